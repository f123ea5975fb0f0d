/// Column names and types of the sample dataset.
pub mod dataset {
    use arrow::datatypes::DataType;

    /// Column holding the raw tweet text. The only column the pipeline reads.
    pub const TEXT_COLUMN: &str = "text";

    /// Whether a column type can be read as text.
    pub fn is_text_type(data_type: &DataType) -> bool {
        matches!(data_type, DataType::Utf8 | DataType::LargeUtf8)
    }
}
