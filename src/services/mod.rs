pub mod amadeus_service;
pub mod cache_service;
pub mod chat_service;
pub mod destination_service;
pub mod groq_service;
pub mod http_service;
pub mod pexels_service;
pub mod serpapi_service;
pub mod wikipedia_service;
