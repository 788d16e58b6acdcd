// Adapters behind the app ports
pub mod asset_source;
pub mod chart_output_adapter;
pub mod http_client;

pub use asset_source::AssetLoader;
pub use chart_output_adapter::{DirectoryChartOutput, FileChartOutput, StdoutChartOutput};
pub use http_client::ReqwestHttp;
