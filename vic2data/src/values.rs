use std::path::Path;

use serde::Serialize;

use crate::db::Database;
use crate::error::{Diagnostics, LoadError};

pub const NATIONAL_VALUES_FILE: &str = "common/nationalvalues.txt";

#[derive(Debug, Clone, Serialize)]
pub struct NationalValue {
    pub name: String,
}

named!(NationalValue);

/// Loads `common/nationalvalues.txt`. Only the names are kept; the modifier
/// bodies are not interpreted.
pub fn load_national_values(db: &mut Database, path: &Path) -> Result<(), LoadError> {
    let mut diag = Diagnostics::for_path(path);
    let root = diag.parse(path)?;
    for value_l in &root.children {
        if !value_l.is_named_group() {
            diag.error(format_args!("Expected a national value block, found '{}'", value_l.name()));
            continue;
        }
        let name = value_l.name();
        if db.national_values.find(&name).is_some() {
            diag.error(format_args!("Duplicate national value '{}'", name));
            continue;
        }
        db.national_values.add(NationalValue { name })?;
    }
    log::info!("Loaded {} national values", db.national_values.len());
    db.national_values.freeze();
    diag.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_national_values() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"nv_order = { stability = 0.1 }\nnv_liberty = { }\nnv_order = { }\nloose = 3\n")
            .unwrap();
        let mut db = Database::new();
        let result = load_national_values(&mut db, file.path());
        assert!(matches!(result, Err(LoadError::Invalid { errors: 2, .. })));
        assert_eq!(db.national_values.len(), 2);
        assert!(db.national_values.find("nv_liberty").is_some());
    }
}
