use borsh::BorshSerialize;

use crate::address::Address;
use crate::ledger::LedgerError;
use crate::models::{discriminator, AccountError};
use crate::wallet::{Signature, Wallet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoInstruction {
    InitializeUser,
    AddTodo { content: String },
    MarkTodo { todo_idx: u8 },
    RemoveTodo { todo_idx: u8 },
}

impl TodoInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            TodoInstruction::InitializeUser => "initialize_user",
            TodoInstruction::AddTodo { .. } => "add_todo",
            TodoInstruction::MarkTodo { .. } => "mark_todo",
            TodoInstruction::RemoveTodo { .. } => "remove_todo",
        }
    }

    /// Instruction data: 8-byte discriminator followed by the borsh-encoded arguments
    pub fn data(&self) -> Result<Vec<u8>, AccountError> {
        let mut out = discriminator("global", self.name()).to_vec();
        let written = match self {
            TodoInstruction::InitializeUser => Ok(()),
            TodoInstruction::AddTodo { content } => content.serialize(&mut out),
            TodoInstruction::MarkTodo { todo_idx } | TodoInstruction::RemoveTodo { todo_idx } => {
                todo_idx.serialize(&mut out)
            }
        };
        written.map_err(|e| AccountError::Encode {
            name: self.name(),
            reason: e.to_string(),
        })?;
        Ok(out)
    }
}

/// Accounts passed alongside an instruction, in the order the program declares them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionAccounts {
    pub authority: Address,
    pub user_profile: Address,
    pub todo_account: Option<Address>,
    pub system_program: Address,
}

impl InstructionAccounts {
    pub fn new(authority: Address, user_profile: Address, todo_account: Option<Address>) -> Self {
        Self {
            authority,
            user_profile,
            todo_account,
            system_program: Address::default(),
        }
    }

    pub fn to_vec(&self) -> Vec<Address> {
        let mut out = vec![self.authority, self.user_profile];
        out.extend(self.todo_account);
        out.push(self.system_program);
        out
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub program_id: Address,
    pub instruction: TodoInstruction,
    pub accounts: InstructionAccounts,
    pub signature: Signature,
}

impl Transaction {
    /// Bytes covered by the authority's signature
    pub fn message(
        program_id: &Address,
        instruction: &TodoInstruction,
        accounts: &InstructionAccounts,
    ) -> Result<Vec<u8>, AccountError> {
        let mut out = program_id.to_bytes().to_vec();
        out.extend(instruction.data()?);
        for account in accounts.to_vec() {
            out.extend_from_slice(account.as_ref());
        }
        Ok(out)
    }

    pub fn sign(
        wallet: &dyn Wallet,
        program_id: Address,
        instruction: TodoInstruction,
        accounts: InstructionAccounts,
    ) -> Result<Self, LedgerError> {
        let message = Self::message(&program_id, &instruction, &accounts)?;
        let signature = wallet.sign_message(&message)?;
        Ok(Self {
            program_id,
            instruction,
            accounts,
            signature,
        })
    }

    pub fn signed_message(&self) -> Result<Vec<u8>, AccountError> {
        Self::message(&self.program_id, &self.instruction, &self.accounts)
    }
}
