/*!
# Twinscan Surface - Console Backend

`RenderSurfaceBackend` for a dual-screen console: a TV output and a
handheld (DRC) output, each fed through a hardware scan buffer.

## Memory model

- Command buffer and context state: process default heap, survive
  foreground release
- Scan buffers: foreground bucket frame heap
- Render targets: MEM1 frame heap

Both frame heaps are bulk-freed when the OS asks for the foreground and
reacquired when it gives it back.

## Platform seams

- `DisplayController`: GPU and display controller primitives
- `ForegroundLifecycle`: OS foreground/background message protocol

`EmulatedDisplay` and `ScriptedLifecycle` implement both in software so
the backend can run headless.
*/

mod console_backend;
mod console_config;
mod console_display;
mod console_emulated_display;
mod console_foreground;
mod console_frame_heap;
mod console_mode_table;
mod console_scripted_lifecycle;

pub use console_backend::{ConsoleBackend, EmulatedConsoleBackend, ScanBuffer};
pub use console_config::{ConsoleConfig, DEFAULT_COMMAND_BUFFER_SIZE};
pub use console_display::{
    BaseHeap, DisplayController, HeapRegion, InvalidateMode, ScanTarget, TvRenderMode, TvScanMode,
    COMMAND_BUFFER_ALIGNMENT, CONTEXT_STATE_ALIGNMENT, CONTEXT_STATE_SIZE, DRC_HEIGHT, DRC_WIDTH,
    SCAN_BUFFER_ALIGNMENT,
};
pub use console_emulated_display::{
    EmulatedDisplay, ScanOut, DEFAULT_FOREGROUND_SIZE, DEFAULT_MEM1_SIZE,
};
pub use console_foreground::ForegroundLifecycle;
pub use console_frame_heap::FrameHeap;
pub use console_mode_table::{select_tv_mode, TvMode, SMALLEST_MODE, TV_MODES};
pub use console_scripted_lifecycle::ScriptedLifecycle;
