pub mod handlers;
pub mod models;
pub mod page;
pub mod routes;

pub use page::PageInfo;
pub use routes::RouteTable;
