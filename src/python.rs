use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use pyo3::exceptions::{
    PyAttributeError, PyIndexError, PyKeyError, PyRuntimeError, PyTypeError, PyValueError,
};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyModule, PyString, PyTuple};

use crate::attributes::Attributes;
use crate::collection::Collection;
use crate::error::Error;
use crate::operators::Operator;
use crate::path::{AttrPath, DEFAULT_SEPARATOR};
use crate::query::QueryPath;
use crate::value::{Record, Value};

// Nested objects deeper than this are compared by their `str()`.
const MAX_DEPTH: usize = 32;

impl From<Error> for PyErr {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::MissingAttribute { .. } => PyAttributeError::new_err(message),
            Error::AttributeAccess { .. } => PyRuntimeError::new_err(message),
            Error::UnknownOperator { .. } => PyKeyError::new_err(message),
            Error::TypeMismatch { .. } => PyTypeError::new_err(message),
            Error::EmptyPath | Error::IndexOutOfRange { .. } => PyIndexError::new_err(message),
            Error::AmbiguousResult { .. } | Error::Coercion { .. } | Error::InvalidPath { .. } => {
                PyValueError::new_err(message)
            }
        }
    }
}

fn type_name_of(obj: &Bound<'_, PyAny>) -> PyResult<String> {
    obj.get_type().getattr("__name__")?.extract()
}

/// Dict keys for dicts, attributes for everything else. `None` when absent.
fn lookup_attr<'py>(obj: &Bound<'py, PyAny>, name: &str) -> PyResult<Option<Bound<'py, PyAny>>> {
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return dict.get_item(name);
    }
    match obj.getattr(name) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_instance_of::<PyAttributeError>(obj.py()) => Ok(None),
        Err(err) => Err(err),
    }
}

// `Decimal('NaN')` and infinities have no exact form and fall back to floats.
fn decimal_from_py(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    let text = obj.str()?.to_string();
    match BigDecimal::from_str(&text) {
        Ok(decimal) => Ok(Value::Decimal(decimal)),
        Err(err) => obj.extract::<f64>().map(Value::Float).map_err(|_| {
            PyValueError::new_err(format!("Cannot read {text} as a decimal: {err}"))
        }),
    }
}

fn value_from_py(obj: &Bound<'_, PyAny>, depth: usize) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    if let Ok(flag) = obj.downcast::<PyBool>() {
        return Ok(Value::Bool(flag.is_true()));
    }
    if obj.is_instance_of::<PyInt>() {
        return match obj.extract::<i64>() {
            Ok(int) => Ok(Value::Int(int)),
            Err(_) => decimal_from_py(obj),
        };
    }
    if let Ok(float) = obj.downcast::<PyFloat>() {
        return Ok(Value::Float(float.value()));
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(Value::Str(obj.extract()?));
    }
    if depth >= MAX_DEPTH {
        return Ok(Value::Str(obj.str()?.to_string()));
    }
    if obj.is_instance_of::<PyList>() || obj.is_instance_of::<PyTuple>() {
        let items = obj
            .iter()?
            .map(|item| item.and_then(|item| value_from_py(&item, depth + 1)))
            .collect::<PyResult<Vec<Value>>>()?;
        return Ok(Value::List(items));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return record_from_dict(Record::anonymous(), dict, depth);
    }

    let name = type_name_of(obj)?;
    if name == "Decimal" {
        return decimal_from_py(obj);
    }
    if let Ok(fields) = obj.getattr("__dict__") {
        if let Ok(dict) = fields.downcast::<PyDict>() {
            return record_from_dict(Record::new(name), dict, depth);
        }
    }
    Ok(Value::Str(obj.str()?.to_string()))
}

fn record_from_dict(mut record: Record, dict: &Bound<'_, PyDict>, depth: usize) -> PyResult<Value> {
    for (key, value) in dict.iter() {
        record.insert(key.str()?.to_string(), value_from_py(&value, depth + 1)?);
    }
    Ok(Value::Record(record))
}

/// First Python exception raised while reading attributes, shared by every
/// item of one call so it can be re-raised unchanged.
type FailureSlot = Rc<RefCell<Option<PyErr>>>;

/// A Python object seen through [`Attributes`].
#[derive(Clone)]
struct PyAttrs<'py> {
    obj: Bound<'py, PyAny>,
    type_name: String,
    failure: FailureSlot,
}

impl<'py> PyAttrs<'py> {
    fn new(obj: Bound<'py, PyAny>, failure: FailureSlot) -> PyResult<Self> {
        let type_name = type_name_of(&obj)?;
        Ok(Self {
            obj,
            type_name,
            failure,
        })
    }
}

impl Attributes for PyAttrs<'_> {
    fn get_attr(&self, name: &str) -> Option<Value> {
        self.try_get_attr(name).ok().flatten()
    }

    fn try_get_attr(&self, name: &str) -> crate::Result<Option<Value>> {
        let read = lookup_attr(&self.obj, name)
            .and_then(|attr| attr.map(|attr| value_from_py(&attr, 0)).transpose());
        read.map_err(|err| {
            let message = err.to_string();
            self.failure.borrow_mut().get_or_insert(err);
            Error::attribute_access(name, message)
        })
    }

    fn to_value(&self) -> Value {
        value_from_py(&self.obj, 0).unwrap_or_default()
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }
}

fn wrap_items<'py>(
    items: Vec<Bound<'py, PyAny>>,
    failure: &FailureSlot,
) -> PyResult<Collection<PyAttrs<'py>>> {
    items
        .into_iter()
        .map(|obj| PyAttrs::new(obj, Rc::clone(failure)))
        .collect()
}

fn raise(err: Error, failure: &FailureSlot) -> PyErr {
    match (err, failure.borrow_mut().take()) {
        (Error::AttributeAccess { .. }, Some(original)) => original,
        (err, _) => err.into(),
    }
}

fn lookup_pairs(lookups: Option<&Bound<'_, PyDict>>) -> PyResult<Vec<(String, Value)>> {
    let mut pairs = Vec::new();
    if let Some(dict) = lookups {
        for (key, value) in dict.iter() {
            pairs.push((key.extract::<String>()?, value_from_py(&value, 0)?));
        }
    }
    Ok(pairs)
}

/// Follows `path` through attributes (or dict keys). Returns the objects
/// themselves, never copies. A missing attribute returns `default` when one
/// is given; without one it raises under `strict` and returns `None`
/// otherwise.
#[pyfunction]
#[pyo3(signature = (obj, path, default=None, *, separator="__", strict=true))]
fn get_path<'py>(
    py: Python<'py>,
    obj: Bound<'py, PyAny>,
    path: &str,
    default: Option<Bound<'py, PyAny>>,
    separator: &str,
    strict: bool,
) -> PyResult<Bound<'py, PyAny>> {
    let parsed = AttrPath::parse(path, separator);
    if parsed.is_blank() {
        return Ok(obj);
    }

    let root = type_name_of(&obj)?;
    let mut current = obj;
    for name in parsed.iter() {
        current = match lookup_attr(&current, name)? {
            Some(next) => next,
            None => match default {
                Some(default) => return Ok(default),
                None if strict => {
                    let owner = type_name_of(&current)?;
                    return Err(Error::missing_attribute(owner, name)
                        .within(&root, &parsed.render())
                        .into());
                }
                None => return Ok(py.None().into_bound(py)),
            },
        };
        if current.is_none() {
            return Ok(current);
        }
    }
    Ok(current)
}

#[pyfunction]
#[pyo3(signature = (obj, path, value, *, separator="__"))]
fn set_path(obj: Bound<'_, PyAny>, path: &str, value: Bound<'_, PyAny>, separator: &str) -> PyResult<()> {
    let mut parsed = AttrPath::parse(path, separator);
    if parsed.is_blank() {
        return Err(Error::EmptyPath.into());
    }
    let full = parsed.render();
    let root = type_name_of(&obj)?;
    let last = parsed.pop_back()?;

    let mut current = obj;
    for name in parsed.iter() {
        current = match lookup_attr(&current, name)? {
            Some(next) => next,
            None => {
                let owner = type_name_of(&current)?;
                return Err(Error::missing_attribute(owner, name).within(&root, &full).into());
            }
        };
    }

    if let Ok(dict) = current.downcast::<PyDict>() {
        dict.set_item(last, value)
    } else {
        current.setattr(last.as_str(), value)
    }
}

#[pyfunction]
#[pyo3(signature = (key, *, separator="__"))]
fn parse_query(key: &str, separator: &str) -> (String, String) {
    let query = QueryPath::parse(key, separator);
    (query.path().render(), query.operator().name().to_string())
}

#[pyfunction]
fn evaluate(operator: &str, value: &Bound<'_, PyAny>, rhs: &Bound<'_, PyAny>) -> PyResult<bool> {
    let operator = Operator::from_name(operator)?;
    let matched = operator.evaluate(&value_from_py(value, 0)?, &value_from_py(rhs, 0)?)?;
    Ok(matched)
}

#[pyfunction]
#[pyo3(signature = (items, **lookups))]
fn filter_items<'py>(
    items: Vec<Bound<'py, PyAny>>,
    lookups: Option<&Bound<'py, PyDict>>,
) -> PyResult<Vec<Bound<'py, PyAny>>> {
    let failure = FailureSlot::default();
    let filtered = wrap_items(items, &failure)?
        .filter(lookup_pairs(lookups)?)
        .map_err(|err| raise(err, &failure))?;
    Ok(filtered.into_iter().map(|item| item.obj).collect())
}

#[pyfunction]
#[pyo3(signature = (items, **lookups))]
fn exclude_items<'py>(
    items: Vec<Bound<'py, PyAny>>,
    lookups: Option<&Bound<'py, PyDict>>,
) -> PyResult<Vec<Bound<'py, PyAny>>> {
    let failure = FailureSlot::default();
    let kept = wrap_items(items, &failure)?
        .exclude(lookup_pairs(lookups)?)
        .map_err(|err| raise(err, &failure))?;
    Ok(kept.into_iter().map(|item| item.obj).collect())
}

#[pyfunction]
fn backend_name() -> &'static str {
    "rust"
}

#[pymodule]
fn _attrwalk_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(get_path, module)?)?;
    module.add_function(wrap_pyfunction!(set_path, module)?)?;
    module.add_function(wrap_pyfunction!(parse_query, module)?)?;
    module.add_function(wrap_pyfunction!(evaluate, module)?)?;
    module.add_function(wrap_pyfunction!(filter_items, module)?)?;
    module.add_function(wrap_pyfunction!(exclude_items, module)?)?;
    module.add_function(wrap_pyfunction!(backend_name, module)?)?;
    module.add("DEFAULT_SEPARATOR", DEFAULT_SEPARATOR)?;
    Ok(())
}
