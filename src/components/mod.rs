pub mod city_graph;
