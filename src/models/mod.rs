pub mod book;
pub mod checkout;
pub mod copy;
pub mod reservation;
pub mod user;

pub use book::Book;
pub use copy::CopyStatus;
pub use user::Role;
