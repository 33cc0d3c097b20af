//! Column and table name defaults shared across the pipeline stages

/// Join key present in both input files
pub const ID_COLUMN: &str = "id";

/// Packed `name-value;name-value` column in the categories file
pub const CATEGORIES_COLUMN: &str = "categories";

/// Separator between category tokens
pub const TOKEN_DELIMITER: &str = ";";

/// Separator between a category name and its value
pub const NAME_SEPARATOR: &str = "-";

/// Table written to the output database
pub const DEFAULT_TABLE_NAME: &str = "DisasterResponse";

/// Suffixes for non-key columns present in both joined inputs
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

/// Cell texts read as missing values
pub const MISSING_VALUE_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "disaster_etl=info";

/// File name prefix for the daily-rotated JSON log
pub const LOG_FILE_NAME: &str = "etl.log";

pub const USAGE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as \
well as the filepath of the database to save the cleaned data \
to as the third argument. \n\nExample: disaster_etl \
disaster_messages.csv disaster_categories.csv \
DisasterResponse.db";
