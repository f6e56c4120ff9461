//! Storage initialization
//!
//! Handles first-run setup and seeding of the global categories

use crate::config::paths::SpendwisePaths;
use crate::error::SpendError;
use crate::models::{Category, GLOBAL_DEFAULTS};

use super::categories::CategoryData;
use super::json_file::JsonFile;

/// Initialize storage for a fresh installation
///
/// Seeds the global categories unless categories.json already exists.
pub fn initialize_storage(paths: &SpendwisePaths) -> Result<(), SpendError> {
    paths.ensure_directories()?;

    if needs_initialization(paths) {
        create_global_categories(paths)?;
    }

    Ok(())
}

fn create_global_categories(paths: &SpendwisePaths) -> Result<(), SpendError> {
    let categories = GLOBAL_DEFAULTS
        .iter()
        .map(|(name, color)| Category::global(*name, *color))
        .collect();

    JsonFile::new(paths.categories_file()).store(&CategoryData { categories })
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &SpendwisePaths) -> bool {
    !paths.categories_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        initialize_storage(&paths).unwrap();

        assert!(!needs_initialization(&paths));
        assert!(paths.data_dir().exists());
    }

    #[test]
    fn test_global_categories_seeded() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        let data: CategoryData = serde_json::from_str(&content).unwrap();

        assert_eq!(data.categories.len(), GLOBAL_DEFAULTS.len());
        assert!(data.categories.iter().all(|c| c.is_global()));
        assert!(data.categories.iter().any(|c| c.name == "Food"));
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let custom = CategoryData {
            categories: vec![Category::global("Only One", "#000000")],
        };
        JsonFile::new(paths.categories_file()).store(&custom).unwrap();

        initialize_storage(&paths).unwrap();

        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        let data: CategoryData = serde_json::from_str(&content).unwrap();
        assert_eq!(data.categories.len(), 1);
        assert_eq!(data.categories[0].name, "Only One");
    }
}
