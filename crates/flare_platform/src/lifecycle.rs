//! Application lifecycle commands

use crate::dispatch::Dispatcher;
use crate::event::AppCommand;
use crate::window::WindowManager;
use tracing::debug;

impl<W: WindowManager> Dispatcher<W> {
    /// Apply one lifecycle command
    pub fn handle_command(&mut self, command: AppCommand) {
        debug!(?command, "app command");
        match command {
            AppCommand::SurfaceCreated => {
                self.surface_ready = true;
                self.windows.surface_changed(true);
                self.invalidate_desktop();
            }
            AppCommand::SurfaceDestroyed => {
                self.surface_ready = false;
                self.grab = None;
                self.translator.reset_buttons();
                self.keyboard.composition_mut().reset();
                self.windows.surface_changed(false);
            }
            AppCommand::SurfaceResized
            | AppCommand::ContentRectChanged
            | AppCommand::ConfigChanged => self.invalidate_desktop(),
            AppCommand::GainedFocus => {
                self.focused = true;
                self.windows.focus_changed(true);
            }
            AppCommand::LostFocus => {
                self.focused = false;
                self.keyboard.composition_mut().reset();
                self.windows.focus_changed(false);
            }
            AppCommand::Resume => {
                self.flags.content_changed = true;
                self.windows.redraw_all();
            }
            AppCommand::LowMemory => self.windows.low_memory(),
            AppCommand::Destroy => {
                self.running = false;
                self.grab = None;
            }
            AppCommand::Start | AppCommand::Pause | AppCommand::Stop | AppCommand::SaveState => {}
        }
    }

    /// Whole surface must be cleared and every window redrawn
    fn invalidate_desktop(&mut self) {
        self.flags.clear_desktop = true;
        self.flags.content_changed = true;
        self.windows.redraw_all();
    }
}
