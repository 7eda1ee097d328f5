pub mod history;
pub mod packet;
pub mod port;
pub mod route;
pub mod table;
