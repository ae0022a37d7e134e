pub mod evaluate;
pub mod record;
pub mod retrain;
pub mod run;
pub mod status;
