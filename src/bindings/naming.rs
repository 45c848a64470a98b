// Names derived from tables and columns for generated bindings
use convert_case::{Case, Casing};

pub const ROUTE_CODE_BASE: u32 = 1000;
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// Record type name, `<prefix><PascalTable>`
pub fn type_name(prefix: &str, table: &str) -> String {
    format!("{}{}", prefix, table.to_case(Case::Pascal))
}

pub fn columns_type_name(prefix: &str, table: &str, suffix: &str) -> String {
    format!("{}{}", type_name(prefix, table), suffix)
}

/// Column-name constant; the column name upper-cased as written
pub fn constant_name(column: &str) -> String {
    column.to_ascii_uppercase()
}

pub fn accessor_name(column: &str) -> String {
    column.to_case(Case::Camel)
}

/// Route constant matching the whole collection, `<TABLE>S`
pub fn collection_constant(table: &str) -> String {
    format!("{}S", table.to_ascii_uppercase())
}

/// Route constant matching a single row, `<TABLE>_ID`
pub fn item_constant(table: &str) -> String {
    format!("{}_ID", table.to_ascii_uppercase())
}

pub fn authority(package: &str, suffix: &str) -> String {
    format!("{}.{}", package, suffix)
}

/// Content path of a table, its name pluralized with `s`
pub fn content_path(table: &str) -> String {
    format!("{}s", table)
}

/// Collection and item route codes for the table at `position`
pub fn route_codes(position: usize) -> (u32, u32) {
    let collection = ROUTE_CODE_BASE + 2 * position as u32 + 1;
    (collection, collection + 1)
}
