//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI and session state machine
//! - [`Driver`]: Platform-specific I/O
//!
//! Events are handled one at a time and each handler runs to completion, so
//! the session's buffer is never observed mid-merge.

use crate::{App, AppAction, AppEvent, Driver};

/// Generic runtime that orchestrates App and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime.
    pub fn new(driver: D, app: App) -> Self {
        Self { driver, app }
    }

    /// Run the main event loop until the App quits or the driver fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error. The driver is
    /// stopped either way.
    pub async fn run(mut self) -> Result<App, D::Error> {
        let result = self.run_loop().await;
        self.driver.stop().await;
        result.map(|()| self.app)
    }

    async fn run_loop(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        let actions = self.app.start();
        if self.process_actions(actions)? {
            return Ok(());
        }

        loop {
            let Some(event) = self.driver.poll_event().await? else {
                continue;
            };
            let actions = self.app.handle(event);
            if self.process_actions(actions)? {
                return Ok(());
            }
        }
    }

    /// Process one event as if the driver had produced it.
    ///
    /// Returns `true` if the App asked to quit.
    pub fn dispatch(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let actions = self.app.handle(event);
        self.process_actions(actions)
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if should quit. Actions before a `Quit` are still
    /// executed so the connection is torn down first.
    fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut render = false;
        for action in actions {
            match action {
                AppAction::Render => render = true,
                AppAction::Quit => return Ok(true),
                AppAction::FetchHistory(request) => self.driver.fetch_history(request),
                AppAction::Connection(action) => self.driver.connection(action),
                AppAction::ScheduleReconnect { id, delay } => {
                    self.driver.schedule_reconnect(id, delay);
                },
                AppAction::LoadRooms => self.driver.load_rooms(),
            }
        }
        if render {
            self.driver.render(&self.app)?;
        }
        Ok(false)
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
