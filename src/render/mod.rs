//! Table building and HTML output, kept apart from fetching.

pub mod fields;
pub mod html;
pub mod table;

pub use fields::{Field, FieldSelection, BASE_FIELDS};
pub use html::{escape_html, render_error, render_table};
pub use table::{build_table, format_clock, format_moon_phase, moon_phase_icon, Cell, Row, Table};
