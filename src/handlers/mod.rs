// Route handlers, one module per surface:
//   resource - generic CRUD for /api/notes, /api/folders, /api/tags
//   users    - POST /api/users, GET /api/users/:id
//   system   - /, /health and the 404 fallback
pub mod resource;
pub mod system;
pub mod users;
