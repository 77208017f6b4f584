//! Gazetteer loader - Reads the city dataset from disk

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use application::{error::ApplicationError, services::Gazetteer};
use tracing::instrument;

/// Load the gazetteer from a tab-separated file
///
/// # Errors
///
/// Returns [`ApplicationError::Configuration`] if the file cannot be opened
/// or read. Malformed rows are skipped, not reported.
#[instrument]
pub fn load_gazetteer(path: &Path) -> Result<Gazetteer, ApplicationError> {
    let file = File::open(path).map_err(|e| {
        ApplicationError::Configuration(format!(
            "Cannot open gazetteer {}: {e}",
            path.display()
        ))
    })?;

    Gazetteer::from_reader(BufReader::new(file)).map_err(|e| {
        ApplicationError::Configuration(format!(
            "Cannot read gazetteer {}: {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_cities_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "2618425\tCopenhagen\tCopenhagen\tKobenhavn,København\t55.67594\t12.56553\tP\tPPLC\tDK\t\t17\t\t\t\t\t1153615\t14\tEurope/Copenhagen\t2024-01-01"
        )
        .unwrap();
        writeln!(file, "broken row").unwrap();

        let gazetteer = load_gazetteer(file.path()).unwrap();
        assert_eq!(gazetteer.len(), 1);
        assert_eq!(gazetteer.search("copenhagen").unwrap()[0].id, 2_618_425);
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_gazetteer(&dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }
}
