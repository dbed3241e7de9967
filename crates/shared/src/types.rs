mod uuid;
pub use self::uuid::*;

mod exercise_date;
pub use exercise_date::*;
