//! Per-block execution of scheduled transactions.
//!
//! Failures come in two tiers. Resolving the creator, decoding, wrapping, signature
//! extraction, a foreign signer and a wrong sequence number halt the whole batch: the
//! remaining transactions of the block stay scheduled and are not looked at again. An invalid
//! signature and a failing message only revert that part and execution carries on.
//!
//! Every transaction is removed from the schedule before anything else happens, so no
//! transaction is ever executed twice.

use std::collections::VecDeque;

use keyshare_store::{KvStore, StoreError};
use keyshare_types::{
    Address, Event, EventSink, Height, ScheduledEncryptedTx, Signature, SignerInfo,
};
use tracing::{debug, info, trace, warn};

use crate::{
    Account, AccountKeeper, ExecContext, ExecError, MsgRouter, Pep, SignModeHandler, SignerData,
    TxBuilder, layout,
};

/// How batch processing proceeds after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Part of a transaction was reverted; the rest of it and the batch carry on.
    LocalSkip(ExecError),
    /// Stop processing the block's remaining transactions.
    HaltBatch(ExecError),
}

#[derive(Debug)]
enum State {
    Idle,
    ProcessingBatch(VecDeque<ScheduledEncryptedTx>),
    Done,
}

/// What happened to the scheduled transactions of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub height: Height,
    /// Indices of executed transactions.
    pub executed: Vec<u64>,
    /// Every revert, by transaction index.
    pub reverted: Vec<(u64, ExecError)>,
    /// Index of the transaction that halted the batch.
    pub halted: Option<u64>,
    /// Transactions left scheduled by a halt.
    pub remaining: usize,
}

impl BatchReport {
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }
}

impl<H: SignModeHandler> Pep<H> {
    /// Execute the transactions scheduled for `height`.
    ///
    /// Only storage failures are returned; execution failures become revert events.
    pub fn begin_block<S, E, A, R>(
        &self,
        store: &mut S,
        events: &mut E,
        accounts: &A,
        router: &mut R,
        height: Height,
    ) -> Result<BatchReport, StoreError>
    where
        S: KvStore,
        E: EventSink,
        A: AccountKeeper + ?Sized,
        R: MsgRouter + ?Sized,
    {
        let mut report = BatchReport {
            height,
            ..BatchReport::default()
        };
        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => {
                    let txs = self.scheduled_txs(store, height)?;
                    store.delete(&layout::next_index(height));
                    if !txs.is_empty() {
                        debug!(%height, n = %txs.len(), "executing scheduled txs");
                    }
                    State::ProcessingBatch(txs.into())
                }
                State::ProcessingBatch(mut txs) => {
                    let Some(tx) = txs.pop_front() else {
                        break;
                    };
                    match self.execute(store, events, accounts, router, &tx, &mut report)? {
                        Outcome::HaltBatch(err) => {
                            let remaining = txs.len();
                            warn!(%height, index = %tx.index, %remaining, %err, "batch halted");
                            report.halted = Some(tx.index);
                            report.remaining = remaining;
                            State::Done
                        }
                        Outcome::Continue | Outcome::LocalSkip(_) => State::ProcessingBatch(txs),
                    }
                }
                State::Done => break,
            }
        }
        Ok(report)
    }

    fn execute<S, E, A, R>(
        &self,
        store: &mut S,
        events: &mut E,
        accounts: &A,
        router: &mut R,
        tx: &ScheduledEncryptedTx,
        report: &mut BatchReport,
    ) -> Result<Outcome, StoreError>
    where
        S: KvStore,
        E: EventSink,
        A: AccountKeeper + ?Sized,
        R: MsgRouter + ?Sized,
    {
        store.delete(&layout::scheduled(tx.target_height, tx.index));

        let (creator, account) = match resolve(accounts, &tx.creator) {
            Ok(x) => x,
            Err(e) => return Ok(revert(events, report, tx, e)),
        };

        let prepared = TxBuilder::decode(&tx.data)
            .and_then(TxBuilder::wrap)
            .and_then(|w| Ok((w.signatures()?, w)));
        let (sigs, wrapped) = match prepared {
            Ok(x) => x,
            Err(e) => return Ok(revert(events, report, tx, e)),
        };

        for (info, sig) in &sigs {
            let nonce = self.increment_nonce(store, &creator)?;
            if let Err(e) = self.check_signature(&creator, &account, &wrapped, info, sig, nonce) {
                let o = revert(events, report, tx, e);
                if matches!(o, Outcome::HaltBatch(_)) {
                    return Ok(o);
                }
            }
        }

        let ctx = ExecContext {
            chain_id: self.chain_id.clone(),
            height: tx.target_height,
            creator,
        };
        for m in wrapped.messages() {
            match router.dispatch(&ctx, m) {
                Ok(()) => trace!(index = %tx.index, msg = %m.type_url, "message executed"),
                Err(e) => {
                    revert(events, report, tx, e.into());
                }
            }
        }

        events.emit(Event::EncryptedTxExecuted {
            creator: tx.creator.clone(),
            height: tx.target_height,
            data: tx.data.clone(),
            index: tx.index,
        });
        report.executed.push(tx.index);
        info!(%creator, height = %tx.target_height, index = %tx.index, "encrypted tx executed");
        Ok(Outcome::Continue)
    }

    fn check_signature(
        &self,
        creator: &Address,
        account: &Account,
        tx: &TxBuilder,
        info: &SignerInfo,
        sig: &Signature,
        nonce: u64,
    ) -> Result<(), ExecError> {
        // only the creator may sign its scheduled transactions
        let Some(public_key) = account.public_key.filter(|k| *k == info.public_key) else {
            return Err(ExecError::SignerMismatch);
        };
        let expected = nonce - 1;
        if info.sequence != expected {
            return Err(ExecError::NonceMismatch {
                expected,
                got: info.sequence,
            });
        }
        let data = SignerData {
            address: *creator,
            chain_id: self.chain_id.clone(),
            account_number: account.number,
            sequence: info.sequence,
            public_key,
        };
        if !public_key.is_valid(&self.sign_mode.sign_bytes(&data, tx), sig) {
            return Err(ExecError::InvalidSignature);
        }
        Ok(())
    }
}

fn resolve<A>(accounts: &A, creator: &str) -> Result<(Address, Account), ExecError>
where
    A: AccountKeeper + ?Sized,
{
    let failed = || ExecError::ActorResolutionFailed(creator.to_string());
    let address: Address = creator.parse().map_err(|_| failed())?;
    let account = accounts.account(&address).ok_or_else(failed)?;
    Ok((address, account))
}

/// Emit the revert event of a failure and classify it.
fn revert<E: EventSink>(
    events: &mut E,
    report: &mut BatchReport,
    tx: &ScheduledEncryptedTx,
    err: ExecError,
) -> Outcome {
    events.emit(Event::EncryptedTxReverted {
        creator: tx.creator.clone(),
        height: tx.target_height,
        reason: err.to_string(),
        index: tx.index,
    });
    report.reverted.push((tx.index, err.clone()));
    if err.halts_batch() {
        Outcome::HaltBatch(err)
    } else {
        warn!(creator = %tx.creator, index = %tx.index, %err, "encrypted tx partially reverted");
        Outcome::LocalSkip(err)
    }
}
