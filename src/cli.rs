// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;

use crate::cmd;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Start the scheduling API server.
    Serve {
        /// Optional path to the deck directory.
        directory: Option<String>,
        /// Port to bind, overriding the config file.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the current study queue.
    Due {
        /// Optional path to the deck directory.
        directory: Option<String>,
        /// Learner whose queue to build.
        #[arg(long, default_value = "default")]
        learner: String,
        /// Restrict the queue to one deck.
        #[arg(long)]
        deck: Option<String>,
        /// Maximum number of cards.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print deck statistics.
    Stats {
        /// Optional path to the deck directory.
        directory: Option<String>,
        /// Learner whose statistics to report.
        #[arg(long, default_value = "default")]
        learner: String,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve { directory, port } => cmd::serve::serve(directory, port).await,
        Command::Due {
            directory,
            learner,
            deck,
            limit,
        } => cmd::due::print_due(directory, &learner, deck.as_deref(), limit),
        Command::Stats { directory, learner } => cmd::stats::print_deck_stats(directory, &learner),
    }
}
