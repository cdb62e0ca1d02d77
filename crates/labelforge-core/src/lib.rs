//! LabelForge Core Library
//!
//! Platform-agnostic model and editing logic for label design: items with
//! rotation-aware hit-testing, an ordered document with change
//! notifications, command-based undo/redo, two persisted formats and an
//! interaction controller that turns input events into commands.

pub mod commands;
pub mod config;
pub mod document;
pub mod format;
pub mod input;
pub mod interaction;
pub mod items;
pub mod page;
pub mod selection;
pub mod snap;
pub mod storage;

pub use commands::{Command, CompositeCommand, ItemSlot, UndoStack, DEFAULT_UNDO_LIMIT};
pub use config::EditorConfig;
pub use document::{DocumentEvent, LabelDocument};
pub use format::{DocumentFormat, FormatError};
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{Gesture, HoverTarget, InteractionController, Response};
pub use items::{ItemId, ItemKind, ItemType, LabelItem, SerializableColor, normalize_angle};
pub use page::{Margins, Orientation, PageSettings, PageSize};
pub use selection::{Handle, HandleKind, HANDLE_SIZE, MIN_ITEM_SIZE, ROTATE_HANDLE_DISTANCE};
pub use snap::{snap_to_grid, SnapResult, GRID_SIZE};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
