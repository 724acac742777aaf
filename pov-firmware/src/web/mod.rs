// Web-Modul für den HTTP Status-Server
// Enthält die JSON-Strukturen für GET /status

pub mod protocol;
