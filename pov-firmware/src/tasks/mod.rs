// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Rotor-Task (Echtzeit) und Refresh-Task (Bild-Update) teilen sich nur
// den Frame Store; der HTTP-Server liest den geteilten Status.

pub mod http;
pub mod refresh;
pub mod rotor;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use http::http_server_task;
pub use refresh::refresh_task;
pub use rotor::rotor_task;
pub use wifi::{connection_task, dhcp_task, net_task};
