//! Data models for services, staff, customers, appointments, visits and attendance.

pub mod appointment;
pub mod attendance;
pub mod customer;
pub mod period;
pub mod service;
pub mod staff;
pub mod visit;

pub use appointment::{Appointment, AppointmentSource, AppointmentStatus, CreateAppointment};
pub use attendance::AttendanceRecord;
pub use customer::{Customer, normalize_email, normalize_phone};
pub use period::YearMonth;
pub use service::{CreateService, GenderRestriction, Service, UpdateService};
pub use staff::{CreateStaff, Staff, StaffRole};
pub use visit::{Bill, LineItem, LineItemKind, Payment, PaymentMethod, PaymentRequest, Visit, VisitStatus};
