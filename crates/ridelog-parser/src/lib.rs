pub mod errors;
pub mod loader;
pub mod schema;
pub mod timestamp;

pub use errors::LoaderError;
pub use loader::{
    load_trip_file, parse_trip_records, validate_header, LoaderOptions, RawTripData,
    RejectedValue,
};
pub use schema::{TripColumn, CANONICAL_COLUMNS, RAW_COLUMNS};
pub use timestamp::{
    format_timestamp_micros, micros_to_datetime, parse_timestamp, parse_timestamp_micros,
    EXPORT_TIMESTAMP_FORMAT, TIMESTAMP_FORMATS,
};
