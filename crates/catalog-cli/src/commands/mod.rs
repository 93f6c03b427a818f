//! Command dispatch: bridges CLI args -> core use cases -> output formatting.

pub mod config_cmd;
pub mod products;
pub mod util;

use std::sync::Arc;
use std::time::Duration;

use catalog_core::{NotificationBus, ProductRepository, ProductUseCases};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Everything a product command needs, built once per invocation.
pub struct Context<R: ProductRepository> {
    pub use_cases: ProductUseCases<R>,
    pub notifications: NotificationBus,
    pub debounce: Duration,
    pub color: bool,
}

impl<R: ProductRepository> Context<R> {
    pub fn new(repo: Arc<R>, notifications: NotificationBus, debounce: Duration, color: bool) -> Self {
        Self {
            use_cases: ProductUseCases::new(repo),
            notifications,
            debounce,
            color,
        }
    }

    /// Print and clear whatever the use cases queued for the user.
    pub fn flush_notifications(&self, quiet: bool) {
        let pending = self.notifications.snapshot();
        output::print_notifications(&pending, quiet, self.color);
        for notification in pending.iter() {
            self.notifications.dismiss(notification.id);
        }
    }
}

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch<R: ProductRepository>(
    cmd: Command,
    ctx: &Context<R>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::List(args) => products::list(ctx, args, global).await,
        Command::Get { id } => products::get(ctx, &id, global).await,
        Command::Create(args) => products::create(ctx, args, global).await,
        Command::Update(args) => products::update(ctx, args, global).await,
        Command::Delete { id } => products::delete(ctx, &id, global).await,
        Command::Verify { id } => products::verify(ctx, &id, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before dispatch"),
    };
    ctx.flush_notifications(global.quiet);
    result
}
