pub mod favorites;
pub mod images;
pub mod listings;
pub mod schemas;
pub mod session;
pub mod sponsorship;
pub mod users;
