//! Client catalogue service
//!
//! Admins maintain the list of clients and the projects under each; users
//! get denormalized snapshots of these rows assigned to them.

use sqlx::PgPool;
use ts_core::{AppError, AppResult, Id};
use ts_db::{
    ClientRepository, ClientRow, CreateClientDto, UpdateClientDto, UserRepository, UserRow,
};

/// Client service implementation
pub struct ClientService {
    clients: ClientRepository,
    users: UserRepository,
}

impl ClientService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// The full catalogue, name ascending
    pub async fn list(&self) -> AppResult<Vec<ClientRow>> {
        Ok(self.clients.find_all().await?)
    }

    /// Insert new clients and update edited ones, then return the full
    /// refreshed catalogue
    pub async fn save(
        &self,
        new_clients: Vec<CreateClientDto>,
        updated: Vec<UpdateClientDto>,
    ) -> AppResult<Vec<ClientRow>> {
        if !new_clients.is_empty() {
            self.clients.insert_many(&new_clients).await?;
        }
        if !updated.is_empty() {
            self.clients.update_many(&updated).await?;
        }
        self.list().await
    }

    /// Delete a client by id
    pub async fn delete(&self, id: Id) -> AppResult<()> {
        let affected = self.clients.delete(id).await?;
        if affected == 0 {
            return Err(AppError::not_found("Client", id));
        }
        Ok(())
    }

    /// The catalogue and the employee list in one round trip (backs the
    /// admin assignment screen)
    pub async fn clients_and_users(&self) -> AppResult<(Vec<ClientRow>, Vec<UserRow>)> {
        let clients = self.clients.find_all().await?;
        let users = self.users.find_employees().await?;
        Ok((clients, users))
    }
}
