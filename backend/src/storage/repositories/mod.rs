pub mod rest_day_repository;
pub mod shift_repository;
pub mod technician_repository;

pub use rest_day_repository::RestDayRepository;
pub use shift_repository::ShiftRepository;
pub use technician_repository::TechnicianRepository;
