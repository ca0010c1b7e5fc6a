use anyhow::Error;
use console::Term;
use dialoguer::{Input, Select};

use crate::unsplash::UnsplashWebConnector;
use crate::unsplash::interrupt::CancelFlag;
use crate::unsplash::io::{Config, Directories};
use crate::unsplash::processor::DEFAULT_THUMBNAIL_SIZE;

/// The name of the cargo package.
const NAME: &str = env!("CARGO_PKG_NAME");

/// The version of the cargo package.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default quality tier for downloads. The API also offers
/// raw | full | small | thumb.
const DEFAULT_QUALITY: &str = "regular";

/// A program class that handles the flow of the downloader user experience
/// and steps of execution.
pub(crate) struct Program;

impl Program {
    /// Creates a new instance of the program.
    pub(crate) fn new() -> Self {
        Self
    }

    /// Runs the downloader program.
    pub(crate) fn run(&self) -> Result<(), Error> {
        Term::stdout().set_title("unsplash downloader");
        trace!("Starting unsplash downloader...");
        trace!("Program Name: {}", NAME);
        trace!("Program Version: {}", VERSION);

        // Check the config file and ensure that it is created.
        trace!("Checking if config file exists...");
        Config::ensure("", "")?;

        let directories = Directories::new();
        directories.ensure_created()?;

        let cancel = CancelFlag::new();
        install_interrupt_handler(cancel.clone());
        let connector = UnsplashWebConnector::new(directories, cancel.clone());

        loop {
            let selection = Select::new()
                .with_prompt("What would you like to do?")
                .items(&[
                    "Fetch photo metadata from the API",
                    "Download cataloged images",
                    "Create thumbnails for downloaded images",
                    "Run the full transform pass",
                    "Show the catalog",
                    "Quit",
                ])
                .default(0)
                .interact()?;

            // An interrupt only cancels the operation it arrived in.
            cancel.reset();

            let result = match selection {
                0 => connector.fetch_metadata().map(|report| {
                    info!(
                        "Fetch ended with {:?} after {} items, persisted to {}.",
                        report.outcome,
                        report.item_count,
                        report.batch_file.display()
                    );
                }),
                1 => {
                    let quality: String = Input::new()
                        .with_prompt("Quality tier")
                        .default(DEFAULT_QUALITY.to_string())
                        .interact_text()?;
                    connector.download_images(&quality).map(|saved| {
                        info!(
                            "{} images saved.",
                            console::style(saved).color256(39).italic()
                        );
                    })
                }
                2 => {
                    let max_size: u32 = Input::new()
                        .with_prompt("Maximum thumbnail dimension")
                        .default(DEFAULT_THUMBNAIL_SIZE)
                        .interact_text()?;
                    connector.create_thumbnails(max_size).map(|created| {
                        info!(
                            "{} thumbnails created.",
                            console::style(created).color256(39).italic()
                        );
                    })
                }
                3 => connector
                    .run_transform_pass(DEFAULT_THUMBNAIL_SIZE)
                    .map(|processed| {
                        info!(
                            "{} images processed.",
                            console::style(processed).color256(39).italic()
                        );
                    }),
                4 => connector.print_catalog(),
                _ => break,
            };

            // Operation failures end the menu entry, not the program.
            if let Err(err) = result {
                error!("{err:#}");
            }
        }

        Ok(())
    }
}

/// Routes Ctrl-C into the shared cancellation flag. The batch loops poll the
/// flag between items; the fetch path still persists its accumulator after
/// it trips.
fn install_interrupt_handler(cancel: CancelFlag) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!("Interrupt handling unavailable: {err}");
                return;
            }
        };

        runtime.block_on(async {
            while tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current item...");
                cancel.cancel();
            }
        });
    });
}
