pub mod attraction;
pub mod chat;
pub mod flight;
pub mod hotel;
pub mod itinerary;
pub mod location;
pub mod media;
