pub mod init_db;
pub mod movers;
pub mod scan;
pub mod universe;
