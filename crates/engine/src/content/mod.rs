mod assets;
mod atomic_io;
mod tmx;

pub use assets::{AssetError, AssetStore, MANIFEST_FILE};
pub use atomic_io::write_text_atomic;
pub use tmx::{load_tmx, parse_tmx, TmxError};
