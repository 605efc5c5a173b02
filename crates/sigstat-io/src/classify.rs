//! Signature metadata from file-path conventions.
//!
//! Two layouts are recognised:
//!
//! - `.../<split>/<device>/u<signer>_<g|s>_<rest>.txt`, the development and
//!   evaluation trees. The database comes from the signer-ID range tables.
//! - any other path containing `signature`: the flat evaluation set, with
//!   unknown device and origin.
//!
//! The tree layout wins whenever the two directories above the file name are
//! a known split and device, so a data root such as `/data/signatures` does
//! not reroute tree files into the flat set.

use sigstat_dataset::{Database, InputDevice, Origin, ParseMetaError, SignatureMeta, Split};

use crate::error::IoError;
use crate::table::DatabaseTable;

fn config_err(file: &str, reason: String) -> IoError {
    IoError::Configuration {
        file: file.to_string(),
        reason,
    }
}

/// Classify the file at `path` (relative to the data root, either separator).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::Configuration`] | too few path components, unknown split or device, origin code other than `g`/`s`, or a signer ID outside every range |
pub fn classify(path: &str, table: &DatabaseTable) -> Result<SignatureMeta, IoError> {
    let file = path.replace('\\', "/");
    let parts: Vec<&str> = file.split('/').filter(|p| !p.is_empty()).collect();
    let Some(&name) = parts.last() else {
        return Err(config_err(&file, "empty path".to_string()));
    };

    let tree = match parts.as_slice() {
        [.., split, device, _] => {
            split.parse::<Split>().is_ok() && device.parse::<InputDevice>().is_ok()
        }
        _ => false,
    };
    if !tree && file.contains("signature") {
        return Ok(SignatureMeta {
            id: name.to_string(),
            signer_id: name.to_string(),
            file: file.clone(),
            origin: Origin::Unknown,
            database: Database::EvalDb,
            device: InputDevice::Unknown,
            split: Split::Evaluation,
        });
    }

    let [.., split, device, _] = parts.as_slice() else {
        return Err(config_err(
            &file,
            format!("expected <split>/<device>/<file>, got {} components", parts.len()),
        ));
    };
    let split: Split = split
        .parse()
        .map_err(|e: ParseMetaError| config_err(&file, e.to_string()))?;
    let device: InputDevice = device
        .parse()
        .map_err(|e: ParseMetaError| config_err(&file, e.to_string()))?;

    let mut tokens = name.split('_');
    let signer_token = tokens.next().unwrap_or_default();
    let origin = match tokens.next() {
        Some("g") => Origin::Genuine,
        Some("s") => Origin::Forged,
        other => {
            return Err(config_err(
                &file,
                format!("unsupported origin code {:?}", other.unwrap_or_default()),
            ));
        }
    };
    let signer_id = signer_token.replace('u', "");

    let database = table
        .database_for(split, device, &signer_id)
        .ok_or_else(|| {
            config_err(
                &file,
                format!("signer {signer_id} is outside every {split}/{device} range"),
            )
        })?;

    Ok(SignatureMeta {
        id: parts[parts.len() - 3..].join("/"),
        signer_id,
        file,
        origin,
        database,
        device,
        split,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DatabaseTable {
        DatabaseTable::default()
    }

    #[test]
    fn development_stylus_genuine() {
        let meta = classify(
            "DeepSignDB/Development/stylus/u0001_g_0001v00.txt",
            &table(),
        )
        .unwrap();
        assert_eq!(meta.signer_id, "0001");
        assert_eq!(meta.id, "Development/stylus/u0001_g_0001v00.txt");
        assert_eq!(meta.file, "DeepSignDB/Development/stylus/u0001_g_0001v00.txt");
        assert_eq!(meta.origin, Origin::Genuine);
        assert_eq!(meta.split, Split::Development);
        assert_eq!(meta.device, InputDevice::Stylus);
        assert_eq!(meta.database, Database::Mcyt);
    }

    #[test]
    fn evaluation_finger_forgery_with_backslashes() {
        let meta = classify(
            r"DeepSignDB\Evaluation\finger\u0410_s_u1015s0001_sg0004.txt",
            &table(),
        )
        .unwrap();
        assert_eq!(meta.signer_id, "0410");
        assert_eq!(meta.origin, Origin::Forged);
        assert_eq!(meta.database, Database::EBioSignDs2);
        assert_eq!(meta.id, "Evaluation/finger/u0410_s_u1015s0001_sg0004.txt");
    }

    #[test]
    fn flat_evaluation_layout() {
        let meta = classify("SVC2021_EvalDB/task1/signature_0042.txt", &table()).unwrap();
        assert_eq!(meta.id, "signature_0042.txt");
        assert_eq!(meta.signer_id, "signature_0042.txt");
        assert_eq!(meta.database, Database::EvalDb);
        assert_eq!(meta.split, Split::Evaluation);
        assert_eq!(meta.device, InputDevice::Unknown);
        assert_eq!(meta.origin, Origin::Unknown);
    }

    #[test]
    fn tree_layout_under_a_signatures_root() {
        let meta = classify(
            "/data/signatures/DeepSignDB/Development/stylus/u0001_g_0001v00.txt",
            &table(),
        )
        .unwrap();
        assert_eq!(meta.database, Database::Mcyt);
        assert_eq!(meta.id, "Development/stylus/u0001_g_0001v00.txt");
        assert_eq!(meta.origin, Origin::Genuine);

        let meta = classify("signatures/Evaluation/finger/u0410_s_1.txt", &table()).unwrap();
        assert_eq!(meta.database, Database::EBioSignDs2);
    }

    #[test]
    fn rejects_unknown_origin_code() {
        let err = classify("Development/stylus/u0001_x_1.txt", &table()).unwrap_err();
        assert!(matches!(err, IoError::Configuration { ref reason, .. } if reason.contains("origin")));
    }

    #[test]
    fn rejects_unknown_split() {
        let err = classify("Training/stylus/u0001_g_1.txt", &table()).unwrap_err();
        assert!(matches!(err, IoError::Configuration { ref reason, .. } if reason.contains("split")));
    }

    #[test]
    fn rejects_signer_outside_ranges() {
        let err = classify("Development/finger/u0001_g_1.txt", &table()).unwrap_err();
        assert!(matches!(err, IoError::Configuration { ref reason, .. } if reason.contains("0001")));
    }

    #[test]
    fn rejects_short_paths() {
        let err = classify("stylus/u0001_g_1.txt", &table()).unwrap_err();
        assert!(matches!(err, IoError::Configuration { .. }));
    }
}
