use tungstenite::protocol::Message;

use crate::reload::active::ClientId;
use crate::reload::message::LiveMessage;

use super::WsActor;

impl WsActor {
    /// Broadcast a message to all connected clients
    pub(super) fn broadcast(&self, msg: &LiveMessage) {
        let text = Message::Text(msg.to_json().into());
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            return;
        }

        clients.retain_mut(|client| match client.ws.send(text.clone()) {
            Ok(_) => true,
            Err(e) => {
                crate::debug!("ws"; "client {} disconnected: {}", client.id, e);
                self.active.remove(client.id);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }

    /// Send a message to specific clients only
    pub(super) fn send_to_clients(&self, targets: &[ClientId], msg: &LiveMessage) {
        let text = Message::Text(msg.to_json().into());
        let mut clients = self.clients.lock();
        let mut sent = 0;

        clients.retain_mut(|client| {
            if !targets.contains(&client.id) {
                return true;
            }
            match client.ws.send(text.clone()) {
                Ok(_) => {
                    sent += 1;
                    true
                }
                Err(e) => {
                    crate::debug!("ws"; "client {} disconnected: {}", client.id, e);
                    self.active.remove(client.id);
                    false
                }
            }
        });

        crate::debug!("ws"; "sent to {}/{} clients", sent, targets.len());
    }
}
