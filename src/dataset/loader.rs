//! Dataset loading from JSON and CSV files

use super::{Dataset, Population};
use crate::error::{ProjectionError, Result};
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

/// Dataset the binaries load when no `--dataset` is given and this file
/// exists in the working directory
pub const DEFAULT_DATASET_PATH: &str = "data/dataset.json";

/// [`DEFAULT_DATASET_PATH`] if that file exists
pub fn default_dataset_path() -> Option<&'static Path> {
    let path = Path::new(DEFAULT_DATASET_PATH);
    path.is_file().then_some(path)
}

/// Load and validate a dataset from a JSON file
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let dataset = Dataset::from_reader(BufReader::new(file))?;
    info!(
        "Loaded dataset '{}' from {} (base year {}, max age {})",
        dataset.metadata.name,
        path.display(),
        dataset.base_year(),
        dataset.max_age()
    );
    Ok(dataset)
}

impl Dataset {
    /// Load and validate a dataset from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_dataset(path)
    }

    /// Parse and validate a dataset from any JSON source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let dataset: Dataset = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Write the dataset as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Replace the base population with one read from CSV, then re-validate
    pub fn with_population_csv<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.population = load_population_csv(path, self.max_age())?;
        self.validate()?;
        Ok(self)
    }
}

/// Raw CSV row: `age,male,female`
#[derive(Debug, Deserialize)]
struct PopulationRow {
    age: usize,
    male: f64,
    female: f64,
}

/// Load a base population with one row per age
pub fn load_population_csv<P: AsRef<Path>>(path: P, max_age: usize) -> Result<Population> {
    let reader = csv::Reader::from_path(path)?;
    read_population(reader, max_age)
}

fn read_population<R: Read>(mut reader: csv::Reader<R>, max_age: usize) -> Result<Population> {
    let mut population = Population::zeros(max_age);
    let mut seen = vec![false; max_age + 1];

    for result in reader.deserialize() {
        let row: PopulationRow = result?;
        if row.age > max_age {
            return Err(ProjectionError::AgeOutOfBounds {
                field: "population.csv".to_string(),
                age: row.age,
                max_age,
            });
        }
        if seen[row.age] {
            return Err(ProjectionError::invalid(
                "population.csv",
                format!("age {} appears more than once", row.age),
            ));
        }
        seen[row.age] = true;
        population.male[row.age] = row.male;
        population.female[row.age] = row.female;
    }

    let rows = seen.iter().filter(|&&s| s).count();
    if rows != max_age + 1 {
        return Err(ProjectionError::LengthMismatch {
            field: "population.csv".to_string(),
            expected: max_age + 1,
            actual: rows,
        });
    }

    Ok(population)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn test_read_population() {
        let data = "age,male,female\n0,10,9\n1,8,7.5\n2,5,6\n";
        let pop = read_population(reader(data), 2).unwrap();
        assert_eq!(pop.male, vec![10.0, 8.0, 5.0]);
        assert_eq!(pop.female, vec![9.0, 7.5, 6.0]);
    }

    #[test]
    fn test_missing_age_fails() {
        let data = "age,male,female\n0,10,9\n2,5,6\n";
        assert!(matches!(
            read_population(reader(data), 2),
            Err(ProjectionError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_age_beyond_max_fails() {
        let data = "age,male,female\n0,10,9\n1,1,1\n2,5,6\n3,1,1\n";
        assert!(matches!(
            read_population(reader(data), 2),
            Err(ProjectionError::AgeOutOfBounds { age: 3, .. })
        ));
    }

    #[test]
    fn test_dataset_json_round_trip_validates() {
        let dataset = Dataset::reference();
        let json = serde_json::to_string(&dataset).unwrap();
        let parsed = Dataset::from_reader(json.as_bytes()).unwrap();
        assert_eq!(parsed.max_age(), dataset.max_age());
        assert!((parsed.population.total() - dataset.population.total()).abs() < 1e-6);
    }

    #[test]
    fn test_write_json_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let mut dataset = Dataset::reference();
        dataset.metadata.name = "written".to_string();
        dataset.write_json(&path).unwrap();

        let loaded = Dataset::from_json_path(&path).unwrap();
        assert_eq!(loaded.metadata.name, "written");
        assert_eq!(loaded.base_year(), dataset.base_year());
        assert!((loaded.mortality.total() - dataset.mortality.total()).abs() < 1e-9);
    }

    #[test]
    fn test_missing_dataset_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Dataset::from_json_path(dir.path().join("absent.json")),
            Err(ProjectionError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_json_dataset_is_rejected() {
        let mut dataset = Dataset::reference();
        dataset.relative_wage.male.truncate(10);
        let json = serde_json::to_string(&dataset).unwrap();
        assert!(matches!(
            Dataset::from_reader(json.as_bytes()),
            Err(ProjectionError::LengthMismatch { .. })
        ));
    }
}
