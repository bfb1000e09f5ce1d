pub mod bar;
pub mod bar_series;
pub mod pair;
pub mod request_params;
pub mod timeframe;
