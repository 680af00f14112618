pub mod excuses;
