pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    category_detail, empty, header, info, service_detail, success, summary_row, warn,
};
pub use table::{categories_table, counts_table, services_table};
pub use theme::{theme, Theme};
