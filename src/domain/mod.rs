pub mod chart;
pub mod track;
pub mod track_id;
