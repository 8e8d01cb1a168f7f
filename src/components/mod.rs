pub mod airport_map;
