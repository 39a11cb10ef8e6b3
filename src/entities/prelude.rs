pub use super::appointments::Entity as Appointments;
pub use super::attendance_records::Entity as AttendanceRecords;
pub use super::customers::Entity as Customers;
pub use super::services::Entity as Services;
pub use super::staff::Entity as Staff;
pub use super::visit_items::Entity as VisitItems;
pub use super::visits::Entity as Visits;
