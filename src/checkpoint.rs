//! Saving and restoring named parameter sets.
//!
//! A state dict is a plain map from parameter name to shape + flat payload,
//! serialized as JSON. Loading writes the stored payloads back into existing
//! `Value`s in place, so optimizer handles to the parameters stay valid.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RevGradError;
use crate::types::Element;
use crate::value::Value;

/// One saved parameter: its shape and row-major payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

/// A serializable snapshot of a named parameter set.
///
/// `BTreeMap` keeps the serialized form ordered by name, so two snapshots of
/// the same parameters serialize byte-identically.
pub type StateDict<T> = BTreeMap<String, Entry<T>>;

/// Captures the current payloads of `params` into a [`StateDict`].
///
/// Fails with [`RevGradError::Checkpoint`] if any payload contains a
/// non-finite element, since those do not round-trip through JSON.
pub fn state_dict<T: Element>(
    params: &[(String, Value<T>)],
) -> Result<StateDict<T>, RevGradError> {
    let mut dict = StateDict::new();
    for (name, param) in params {
        let data = param.get_data();
        if data.iter().any(|x| !x.is_finite()) {
            return Err(RevGradError::Checkpoint(format!(
                "parameter {name:?} contains a non-finite element"
            )));
        }
        dict.insert(
            name.clone(),
            Entry {
                shape: param.shape(),
                data,
            },
        );
    }
    Ok(dict)
}

/// Writes the stored payloads back into `params` in place.
///
/// Every parameter must be present in `dict` with a matching shape. Extra
/// entries in `dict` are ignored with a warning.
pub fn load_state_dict<T: Element>(
    params: &[(String, Value<T>)],
    dict: &StateDict<T>,
) -> Result<(), RevGradError> {
    for (name, param) in params {
        let entry = dict.get(name).ok_or_else(|| {
            RevGradError::Checkpoint(format!("parameter {name:?} missing from state dict"))
        })?;
        if entry.shape != param.shape() {
            return Err(RevGradError::ShapeMismatch {
                expected: param.shape(),
                actual: entry.shape.clone(),
                operation: format!("load_state_dict ({name})"),
            });
        }
        param.set_data(entry.data.clone())?;
    }
    for name in dict.keys() {
        if !params.iter().any(|(n, _)| n == name) {
            log::warn!("state dict entry {name:?} matches no parameter, ignoring");
        }
    }
    Ok(())
}

/// Serializes `params` to a JSON file at `path`.
pub fn save<T: Element + Serialize>(
    params: &[(String, Value<T>)],
    path: impl AsRef<Path>,
) -> Result<(), RevGradError> {
    let dict = state_dict(params)?;
    let file = File::create(path.as_ref())
        .map_err(|e| RevGradError::Checkpoint(format!("create {:?}: {e}", path.as_ref())))?;
    serde_json::to_writer(BufWriter::new(file), &dict)
        .map_err(|e| RevGradError::Checkpoint(format!("serialize: {e}")))?;
    log::debug!(
        "saved {} parameter(s) to {:?}",
        params.len(),
        path.as_ref()
    );
    Ok(())
}

/// Reads a JSON state dict from `path` and loads it into `params` in place.
pub fn load<T: Element + DeserializeOwned>(
    params: &[(String, Value<T>)],
    path: impl AsRef<Path>,
) -> Result<(), RevGradError> {
    let file = File::open(path.as_ref())
        .map_err(|e| RevGradError::Checkpoint(format!("open {:?}: {e}", path.as_ref())))?;
    let dict: StateDict<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| RevGradError::Checkpoint(format!("deserialize: {e}")))?;
    load_state_dict(params, &dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::create::scalar;

    fn params() -> Vec<(String, Value<f64>)> {
        let w = Value::new(vec![0.1, -2.5, 3.75], vec![3]).unwrap();
        w.requires_grad_(true).unwrap();
        let b = scalar(0.5).unwrap();
        b.requires_grad_(true).unwrap();
        vec![("w".to_string(), w), ("b".to_string(), b)]
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("revgrad-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn test_state_dict_round_trip_in_memory() {
        let source = params();
        let dict = state_dict(&source).unwrap();

        let target = params();
        target[0].1.set_data(vec![0.0, 0.0, 0.0]).unwrap();
        target[1].1.set_data(vec![0.0]).unwrap();
        load_state_dict(&target, &dict).unwrap();

        // Exact, not approximate: restored payloads are bit-identical.
        assert_eq!(target[0].1.get_data(), vec![0.1, -2.5, 3.75]);
        assert_eq!(target[1].1.item().unwrap(), 0.5);
    }

    #[test]
    fn test_file_round_trip() {
        let path = temp_path("roundtrip");
        let source = params();
        save(&source, &path).unwrap();

        let target = params();
        target[0].1.set_data(vec![9.0, 9.0, 9.0]).unwrap();
        load(&target, &path).unwrap();
        assert_eq!(target[0].1.get_data(), source[0].1.get_data());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let source = params();
        let dict = state_dict(&source[..1]).unwrap();
        assert!(matches!(
            load_state_dict(&source, &dict),
            Err(RevGradError::Checkpoint(_))
        ));
    }

    #[test]
    fn test_shape_mismatch_is_an_error() {
        let source = params();
        let mut dict = state_dict(&source).unwrap();
        dict.get_mut("w").unwrap().shape = vec![1, 3];
        assert!(matches!(
            load_state_dict(&source, &dict),
            Err(RevGradError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_payload() {
        let p = scalar(f64::NAN).unwrap();
        p.requires_grad_(true).unwrap();
        assert!(matches!(
            state_dict(&[("w".to_string(), p)]),
            Err(RevGradError::Checkpoint(_))
        ));
    }
}
