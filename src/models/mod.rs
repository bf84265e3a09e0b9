pub mod allocation;
pub mod amount;
pub mod department;
pub mod expense_category;
pub mod record;
pub mod transaction;
