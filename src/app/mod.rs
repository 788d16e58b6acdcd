// Use cases and the ports they drive
pub mod ports;
pub mod load_use_case;
pub mod normalize_use_case;
pub mod chart_use_case;

pub use chart_use_case::{build_chart, ChartKind, ChartUseCase, ExportSummary};
pub use load_use_case::{ChartInputs, LoadUseCase};
pub use normalize_use_case::NormalizeUseCase;
