/// Winit adapter - translate winit window events into host events

use winit::event::WindowEvent;

use crate::desktop_headless_gl::HeadlessGl;
use crate::desktop_window_host::HostEvent;

/// Map a winit window event onto the events the desktop backend reacts to
#[must_use]
pub fn translate_window_event(event: &WindowEvent) -> Option<HostEvent> {
    match event {
        WindowEvent::Resized(size) => Some(HostEvent::Resized {
            width: size.width.min(i32::MAX as u32) as i32,
            height: size.height.min(i32::MAX as u32) as i32,
        }),
        WindowEvent::CloseRequested => Some(HostEvent::CloseRequested),
        _ => None,
    }
}

/// Replay a winit event on the software window
///
/// Returns whether the event was relevant.
pub fn forward_window_event(gl: &mut HeadlessGl, event: &WindowEvent) -> bool {
    match translate_window_event(event) {
        Some(HostEvent::Resized { width, height }) => {
            gl.resize_window(width, height);
            true
        }
        Some(HostEvent::CloseRequested) => {
            gl.request_close();
            true
        }
        None => false,
    }
}
