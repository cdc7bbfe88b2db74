//! # `cram payment` — Tuition Invoices

use clap::{Args, Subcommand};

use cram_core::PaymentId;
use cram_service::StudioService;
use cram_state::{format_won, PaymentMethod, PaymentStatus};

/// Payment subcommands.
#[derive(Args, Debug)]
pub struct PaymentArgs {
    #[command(subcommand)]
    command: PaymentCommand,
}

#[derive(Subcommand, Debug)]
enum PaymentCommand {
    /// List invoices, newest first.
    List {
        /// Restrict to one status: pending or paid.
        #[arg(long)]
        status: Option<PaymentStatus>,
    },
    /// Confirm receipt of a tuition payment.
    Confirm {
        /// Payment identifier.
        id: PaymentId,
        /// Method code: transfer or cash.
        #[arg(long, default_value = "transfer")]
        method: PaymentMethod,
        /// Free-form note.
        #[arg(long)]
        memo: Option<String>,
    },
    /// Compose the guardian-facing tuition notice.
    Notice {
        /// Payment identifier.
        id: PaymentId,
    },
}

/// Dispatch a `cram payment` subcommand. Returns whether the ledger
/// changed.
pub fn run_payment(args: &PaymentArgs, service: &mut StudioService) -> anyhow::Result<bool> {
    match &args.command {
        PaymentCommand::List { status } => {
            for payment in service.list_payments(*status) {
                let name = service
                    .ledger
                    .student(payment.student_id)
                    .map(|s| s.name.as_str())
                    .unwrap_or("?");
                let sent = if payment.message_sent { "notified" } else { "-" };
                println!(
                    "{}  {}  {} won  {}  {}",
                    payment.id,
                    name,
                    format_won(payment.amount),
                    payment.status,
                    sent,
                );
            }
            Ok(false)
        }
        PaymentCommand::Confirm { id, method, memo } => {
            service.confirm_payment(*id, *method, memo.clone())?;
            println!("confirmed {id} ({method})");
            Ok(true)
        }
        PaymentCommand::Notice { id } => {
            let text = service.compose_notice(*id)?;
            println!("{text}");
            // compose_notice flips the message-sent flag.
            Ok(true)
        }
    }
}
