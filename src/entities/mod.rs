pub mod prelude;

pub mod items;
pub mod tokens;
pub mod users;
