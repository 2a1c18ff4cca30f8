pub mod health;
pub mod landing;
