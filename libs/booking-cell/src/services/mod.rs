pub mod availability;
pub mod booking;
pub mod directory;
pub mod patient;
pub mod validation;

pub use availability::AvailabilityService;
pub use booking::BookingService;
pub use directory::DirectoryService;
pub use patient::PatientService;
